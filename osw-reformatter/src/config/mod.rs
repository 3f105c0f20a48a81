mod reformatter_configuration;

pub use reformatter_configuration::ReformatterConfiguration;
