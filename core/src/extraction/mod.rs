pub mod classify;
pub mod csa;
pub mod decode;
pub mod elements;
pub mod tags;

pub use classify::{classify, classify_category, is_private_creator, is_private_data, PrivateCreatorMap};
pub use csa::{parse as parse_csa, CsaEntry, CsaFormat, CsaHeaderSummary, CsaNotRecognized};
pub use decode::{decode_private_payload, HEX_DISPLAY_LIMIT};
pub use elements::decode_elements;
