/// Plain data records produced by the loaders.
pub mod models;
/// Loader for the `ANSWER:` block question file format.
pub mod question_file;
