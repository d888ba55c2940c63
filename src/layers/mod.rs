pub mod attention;
pub mod dropout;
pub mod embedding;
pub mod linear;
pub mod lstm;
pub mod sigmoid;
pub mod tanh;

pub use attention::Attention;
pub use dropout::Dropout;
pub use embedding::EmbeddingT;
pub use linear::LinearT;
pub use lstm::LSTM;
