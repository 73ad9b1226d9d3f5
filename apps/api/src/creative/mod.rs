// Creative generation on top of image_client.
// generator: full DALL-E 3 creatives saved to disk; styled: in-memory style variants.

pub mod generator;
pub mod handlers;
pub mod styled;
