mod request_connection_token;

pub use request_connection_token::RequestConnectionToken;
