pub mod block_adapter;
pub mod payload_buffer;
pub mod sample_block;
