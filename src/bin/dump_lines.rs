use rate_sheet_importer::extract_pages;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: dump-lines <pdf_path> [max_page | min-max]");
        std::process::exit(1);
    }

    let range = args.get(2).map(|s| s.as_str()).unwrap_or("1-1");
    let (min_page, max_page) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(1))
    } else {
        (1, range.parse().unwrap_or(1))
    };

    let pages = match extract_pages(&args[1]) {
        Ok(pages) => pages,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for page in pages
        .iter()
        .filter(|p| p.number >= min_page && p.number <= max_page)
    {
        println!("=== PAGE {} ({} lines) ===", page.number, page.lines.len());
        for (index, line) in page.lines.iter().enumerate() {
            println!("  {:4} {:?}", index, line);
        }
        println!();
    }
}
