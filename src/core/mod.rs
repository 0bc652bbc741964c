pub mod container;
pub mod parser;
pub mod renamer;
pub mod scanner;
pub mod tagger;
