pub mod origin_filter;

pub use origin_filter::OriginFilter;
