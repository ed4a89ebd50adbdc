use appstore_price_sync::{PricePointCodec, PricePointKey};
use clap::Parser;

#[derive(Parser)]
#[command(name = "create-price-point-id")]
#[command(about = "Encode (item, territory, tier) as a price point id, or decode one")]
struct Args {
    /// App or in-app purchase id
    #[arg(long = "s", required_unless_present = "decode")]
    item_id: Option<String>,

    /// Territory code, e.g. USA
    #[arg(long = "t", required_unless_present = "decode")]
    territory: Option<String>,

    /// Price tier code, e.g. 10010
    #[arg(long = "p", required_unless_present = "decode")]
    tier: Option<String>,

    /// Decode an existing price point id instead
    #[arg(long, conflicts_with_all = ["item_id", "territory", "tier"])]
    decode: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Some(id) = args.decode {
        match PricePointCodec::decode(&id) {
            Ok(key) => {
                println!("{}", PricePointCodec::to_json(&key));
                return;
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }

    let key = PricePointKey::new(
        args.item_id.unwrap_or_default(),
        args.territory.unwrap_or_default(),
        args.tier.unwrap_or_default(),
    );
    println!("{}", PricePointCodec::to_json(&key));
    println!("{}", PricePointCodec::encode(&key));
}
