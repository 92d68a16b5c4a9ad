use dotenv::dotenv;
use taskstack::config::Config;
use taskstack::supervisor::Supervisor;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    println!("Starting task management stack supervisor");
    let supervisor = Supervisor::new(config);
    if let Err(e) = supervisor.run().await {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }

    println!("Shutdown complete");
}
