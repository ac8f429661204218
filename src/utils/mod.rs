pub mod username_filter;
