pub mod eviction_list;

pub use eviction_list::EvictionList;
