use env_logger::{Builder, Env};
use log::warn;
use snote_reader::{Document, LayerName, RattaRleDecoder, parse_document};
use std::env;
use std::fs;

fn init_logger() {
    // RUST_LOG overrides, e.g. RUST_LOG=debug
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-note-file> [--decode]", args[0]);
        std::process::exit(1);
    }

    let note_path = &args[1];
    let decode = args.iter().skip(2).any(|arg| arg == "--decode");

    println!("Reading note file: {}", note_path);
    println!("{}", "=".repeat(60));

    let buffer = match fs::read(note_path) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("\nERROR: Failed to open note file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    match parse_document(&buffer) {
        Ok(document) => {
            print_summary(&document);
            if decode {
                decode_pages(&document);
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to parse note file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn print_summary(document: &Document) {
    let header = &document.header;

    println!("\nNote Information:");
    println!("  Signature: {}", document.signature);
    println!("  Version: {}", document.version);
    println!("  Device: {}", header.apply_equipment);
    println!("  App version: {}", header.app_version);
    println!("  Last opened page: {}", header.final_operation_page);
    println!("  Cover: {}", if document.cover.is_some() { "yes" } else { "no" });

    println!("\nStatistics:");
    println!("  Pages: {}", document.page_count());
    println!("  Keywords: {}", document.keywords.values().map(Vec::len).sum::<usize>());
    println!("  Titles: {}", document.titles.values().map(Vec::len).sum::<usize>());

    for (i, page) in document.pages.iter().enumerate() {
        println!("\nPage {} [{}] style {}", i + 1, page.key, page.page_style);
        let order: Vec<String> = page
            .layers_in_paint_order()
            .map(|layer| {
                let size = layer.bitmap().map_or(0, <[u8]>::len);
                format!("{}({} bytes)", layer.name, size)
            })
            .collect();
        println!("  Paint order: {}", order.join(" -> "));
        if page.custom_background().is_some() {
            println!("  Custom PNG background");
        }
        if let Some(text) = page.text.as_deref().filter(|text| !text.is_empty()) {
            for line in text.lines() {
                println!("  | {}", line);
            }
        }
    }
}

fn decode_pages(document: &Document) {
    let decoder = RattaRleDecoder::default();
    let (width, height) = (document.layout.page_width, document.layout.page_height);

    println!("\nDecoded layers:");
    for (i, page) in document.pages.iter().enumerate() {
        for layer in page.layers_in_paint_order() {
            let Some(bitmap) = layer.bitmap() else {
                continue;
            };
            if page.custom_background().is_some() && layer.name == LayerName::Background {
                continue;
            }
            let rgba = decoder.decode(bitmap, width, height, false).or_else(|e| {
                warn!("Page {} {}: {}; substituting a blank layer", i + 1, layer.name, e);
                decoder.blank(width, height)
            });
            match rgba {
                Ok(rgba) => println!("  Page {} {}: {} RGBA bytes", i + 1, layer.name, rgba.len()),
                Err(e) => eprintln!("  Page {} {}: {}", i + 1, layer.name, e),
            }
        }
    }
}
