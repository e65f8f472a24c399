use chrono::{TimeZone, Utc};

use common::{Alert, Pattern};

/// Render an alert as the Telegram message body (plain text, bare URLs).
pub fn alert_text(alert: &Alert) -> String {
    let mut lines = vec![
        format!(
            "{} Pattern {} | {} ({})",
            pattern_emoji(alert.pattern),
            alert.pattern,
            alert.symbol,
            alert.chain
        ),
        alert.reason.clone(),
        String::new(),
        format!("Timeframe: {}", alert.timeframe),
        format!("Price: ${:.6}", alert.price),
        format!("EMA50: ${:.6}", alert.ema50),
    ];
    if let Some(market_cap) = alert.market_cap {
        lines.push(format!("Market Cap: ${}", group_thousands(market_cap)));
    }
    lines.push(format!("Address: {}", short_address(&alert.address)));
    lines.push(String::new());
    lines.push(explorer_url(&alert.chain, &alert.address));
    lines.push(bubble_maps_url(&alert.chain, &alert.address));
    lines.push(format_timestamp(alert.timestamp));
    lines.push(String::new());
    lines.push(format!(
        "#Pattern{} #{}",
        alert.pattern,
        alert.symbol.to_uppercase()
    ));
    lines.join("\n")
}

fn pattern_emoji(pattern: Pattern) -> &'static str {
    match pattern {
        Pattern::A => "\u{1F4CA}", // 📊
        Pattern::B => "\u{1F4C8}", // 📈
        Pattern::C => "\u{1F680}", // 🚀
    }
}

fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        address.to_string()
    } else {
        format!("{}...", &address[..12])
    }
}

fn explorer_url(chain: &str, address: &str) -> String {
    match chain {
        "solana" => format!("https://solscan.io/token/{address}"),
        "base" => format!("https://basescan.org/token/{address}"),
        "ethereum" => format!("https://etherscan.io/token/{address}"),
        _ => format!("https://dexscreener.com/{chain}/{address}"),
    }
}

fn bubble_maps_url(chain: &str, address: &str) -> String {
    let code = match chain {
        "solana" => "sol",
        "ethereum" => "eth",
        other => other,
    };
    format!("https://app.bubblemaps.io/{code}/token/{address}")
}

fn format_timestamp(unix: i64) -> String {
    match Utc.timestamp_opt(unix, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("ts {unix}"),
    }
}

fn group_thousands(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
