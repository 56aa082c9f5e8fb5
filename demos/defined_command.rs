use glide_ioredis::{Client, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::connect("redis://127.0.0.1:6379").await?;

    let bump_counter = client.define_command(
        "bumpCounter",
        1,
        "redis.call('INCRBY', KEYS[1], ARGV[1]); return redis.call('GET', KEYS[1])",
    );

    let keys = vec![b"counter".to_vec()];
    let args = vec![b"5".to_vec()];
    let value = client.call_script(&bump_counter, &keys, &args).await?;
    println!("counter is now {value:?}");

    Ok(())
}
