use std::path::Path;

use eracast::{BrandMark, FontSet, SlideDeck, save_all_posts};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let deck_path = args.next().unwrap_or_else(|| "deck.json".to_string());
    let font_path = args.next().unwrap_or_else(|| "font.ttf".to_string());
    let out_dir = args.next().unwrap_or_else(|| "out".to_string());

    let deck: SlideDeck = serde_json::from_str(&std::fs::read_to_string(&deck_path)?)?;
    let font = std::fs::read(&font_path)?;
    let fonts = FontSet::from_bytes(&font, &font, &font, &font)?;

    let written = save_all_posts(&deck, &fonts, &BrandMark::default(), Path::new(&out_dir))?;
    for p in &written {
        println!("wrote {}", p.display());
    }

    Ok(())
}
