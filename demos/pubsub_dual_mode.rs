use glide_ioredis::pubsub::native::NativeSubscriber;
use glide_ioredis::pubsub::resp_binary::RawSubscriber;
use glide_ioredis::{ClientOptions, Result};

/// Same channel, subscribed to through both pub/sub backends at once:
/// native-callback mode for plain text, RESP-binary mode for payloads that
/// need to survive round-tripping without a UTF-8 sentinel.
#[tokio::main]
async fn main() -> Result<()> {
    let options = ClientOptions::new("127.0.0.1", 6379);

    let mut native = NativeSubscriber::connect(&options).await?;
    native.on_message(|message| {
        println!("[native] {} -> {}", message.channel, message.payload);
    });
    native.subscribe("updates").await?;

    let mut raw = RawSubscriber::connect(&options).await?;
    raw.subscribe(b"updates").await?;

    tokio::spawn(native.run());

    while let Some(message) = raw.next_message().await {
        println!("[raw] {} -> {} bytes", String::from_utf8_lossy(&message.channel), message.payload.len());
    }

    Ok(())
}
