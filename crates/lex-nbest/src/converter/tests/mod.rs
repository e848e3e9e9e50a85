use super::*;

mod convert;
