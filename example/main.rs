use hauler::{Client, ClientEvent, Direction, Options, Request, Uri};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let target = std::env::args().nth(1).unwrap_or_else(|| "http://example.com/".into());
    let uri = Uri::parse(&target)?;

    let client = Client::new(uri.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = Request::get(uri.path()).with_header("Accept", "*/*")?;
    client.execute(request, None, Options::new(5_000, 10_000, 8192, 8192), tx)?;

    while let Some(event) = rx.recv().await {
        match event {
            ClientEvent::Progress(progress) => {
                let percent = match progress.direction {
                    Direction::Upload => progress.send_percent,
                    Direction::Download => progress.receive_percent,
                };
                eprintln!("{:?} {} bytes ({percent:.0}%)", progress.direction, progress.packet_size);
            }
            ClientEvent::Complete(mut response) => {
                println!("{} {} {}", response.version(), response.status(), response.reason());
                for (name, value) in response.headers() {
                    println!("{name}: {value}");
                }
                println!();
                println!("{}", response.text().await?);
                client.close()?;
            }
            ClientEvent::Timeout(phase) => {
                eprintln!("timed out while {phase}");
                break;
            }
            ClientEvent::Error(failure) => {
                eprintln!("{failure}");
                break;
            }
            ClientEvent::Close => break,
        }
    }

    Ok(())
}
