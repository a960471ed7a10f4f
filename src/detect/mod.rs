// Source format sniffing — decides whether an image goes through an animation decoder.

pub mod format;
