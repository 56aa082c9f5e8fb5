use glide_ioredis::{
    commands::{KeyCommands, StringCommands},
    Client, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::connect("redis://127.0.0.1:6379").await?;

    let key = "test_key";
    client.set(key, "42").await?;
    let value = client.get(key).await?;
    println!("{key} = {value:?}");
    client.del(vec![key.as_bytes().to_vec()]).await?;

    Ok(())
}
