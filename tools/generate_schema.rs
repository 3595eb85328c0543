//! JSON Schema生成ツール
//!
//! src/domain/config.rsの設定構造からJSON Schema (schema/config.json) を
//! 自動生成します。
//!
//! 実行方法:
//! ```
//! cargo run --bin generate_schema
//! ```

use face_count_alert::domain::config::AppConfig;
use schemars::schema_for;
use std::fs;

fn main() -> anyhow::Result<()> {
    println!("Generating JSON Schema...");

    // AppConfigからJSON Schemaを生成
    let schema = schema_for!(AppConfig);

    // JSON文字列に変換（prettify）
    let json = serde_json::to_string_pretty(&schema)?;

    // schema/ディレクトリを作成して書き出し
    fs::create_dir_all("schema")?;
    fs::write("schema/config.json", json)?;
    println!("  ✓ schema/config.json");

    Ok(())
}
