pub mod spimi;
