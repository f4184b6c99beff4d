mod common;
mod poll;
