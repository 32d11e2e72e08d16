pub mod database;
pub mod generate_random_delay;
