pub mod scope_of_works;
