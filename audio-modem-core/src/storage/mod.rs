pub mod profile_file;
