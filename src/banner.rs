// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
 _     _
| |__ | | ___   ___  _ __ ___  ___  ___ ___  _ __   ___
| '_ \| |/ _ \ / _ \| '_ ` _ \/ __|/ __/ _ \| '_ \ / _ \
| |_) | | (_) | (_) | | | | | \__ \ (_| (_) | |_) |  __/
|_.__/|_|\___/ \___/|_| |_| |_|___/\___\___/| .__/ \___|
                                            |_|

    Bloom's Taxonomy Question Classifier
"#;
    println!("{}", banner);
}
