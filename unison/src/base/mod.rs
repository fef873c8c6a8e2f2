pub(crate) mod display_ext;
