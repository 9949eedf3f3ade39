pub mod chunk_server;
