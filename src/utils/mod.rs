pub(crate) mod reqwest;
