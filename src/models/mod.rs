pub mod copy_rnn;
pub mod decoder;
pub mod encoder;
pub mod selective_read;

pub use copy_rnn::CopyRnn;
pub use decoder::{CopyRnnDecoder, DecoderState};
pub use encoder::{CopyRnnEncoder, EncoderState};
pub use selective_read::SelectiveRead;
