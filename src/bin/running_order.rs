use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    running_order::apps::run_running_order(std::env::args().skip(1))
}
