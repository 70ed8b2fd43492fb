pub mod update_role;
