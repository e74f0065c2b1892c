//! Audio decoding, encoding and assembly.

pub mod assembler;
pub mod decode;
pub mod reference;
pub mod wav;

pub use assembler::{assemble, AssembledTrack};
pub use decode::decode_audio_bytes;
pub use reference::prepare_reference_audio;
pub use wav::{
    decode_base64, decode_hex, duration_in_seconds, encode_base64, encode_wav,
    encode_wav_samples, WAV_HEADER_LEN,
};
