pub mod codec;
pub mod paths;
pub mod route;
pub mod search;

pub use codec::{HashIdCodec, DEFAULT_ALPHABET};
pub use paths::{is_bool_like, parse_bool_like, parse_id_paths, IdPath, PathSegment, PayloadWalker, DEFAULT_MAX_DEPTH};
pub use route::decode_route_id;
pub use search::decode_search_data;
