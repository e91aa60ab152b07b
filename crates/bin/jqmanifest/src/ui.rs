//! Terminal output helpers. Everything goes to stderr so stdout can carry a manifest.

/// Print a success message with a green checkmark
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        eprintln!("{} {}", console::style("✓").green().bold(), format!($($arg)*))
    };
}

/// Print an error message with a red cross, including the full error chain
#[macro_export]
macro_rules! error {
    ($err:expr) => {{
        eprintln!("{} {}", console::style("✗").red().bold(), $err);

        // For anyhow::Error, iterate through the chain
        let err_ref = &$err;
        for (i, cause) in err_ref.chain().skip(1).enumerate() {
            let indent = if i == 0 { "  " } else { "    " };
            eprintln!(
                "{}{} {}",
                indent,
                console::style("→").dim(),
                console::style(cause).dim()
            );
        }
    }};
}
