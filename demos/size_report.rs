//! Size comparison report: text JSON vs. the binary TLV encoding.
//!
//! Run with: cargo run --example size_report

use jsonvalue::{binarize, stringify, KeyValue, Value};

fn print_header() {
    println!(
        "{:<20} {:>12} {:>12} {:>10}",
        "Format", "Size (B)", "vs text", "Ratio"
    );
    println!("{:-<56}", "");
}

fn print_row(name: &str, size: usize, baseline: usize) {
    let ratio = size as f64 / baseline as f64;
    let diff = if size < baseline {
        format!("-{:.1}%", (1.0 - ratio) * 100.0)
    } else if size > baseline {
        format!("+{:.1}%", (ratio - 1.0) * 100.0)
    } else {
        "0.0%".to_string()
    };
    println!("{:<20} {:>12} {:>12} {:>10.2}x", name, size, diff, ratio);
}

fn report(label: &str, v: &Value) {
    println!("\n--- {label} ---\n");
    let text = stringify(v);
    let bin = binarize(v);
    print_header();
    print_row("text", text.len(), text.len());
    print_row("binary", bin.len(), text.len());
}

fn small_object() -> Value {
    Value::object(vec![
        KeyValue::new("name", "my-service"),
        KeyValue::new("version", 42),
        KeyValue::new("enabled", true),
        KeyValue::new("threshold", 0.85),
    ])
}

fn large_array(count: usize) -> Value {
    Value::array((0..count).map(|i| {
        Value::object(vec![
            KeyValue::new("x", i as f64 * 0.1),
            KeyValue::new("y", i as f64 * 0.2),
            KeyValue::new("z", i as f64 * 0.3),
        ])
    }))
}

fn nested_people() -> Value {
    let person = |id: i64, name: &str, company: &str, employees: i64| {
        Value::object(vec![
            KeyValue::new("id", id),
            KeyValue::new("name", name),
            KeyValue::new(
                "employer",
                Value::object(vec![
                    KeyValue::new("name", company),
                    KeyValue::new("employee_count", employees),
                ]),
            ),
        ])
    };
    Value::array(vec![
        person(1, "Alice", "TechCorp", 500),
        person(2, "Bob", "DataInc", 1200),
    ])
}

fn mixed_types() -> Value {
    Value::object(vec![
        KeyValue::new("id", 12345678901234i64),
        KeyValue::new("name", "Test Record"),
        KeyValue::new("tags", Value::array(vec![Value::from("alpha"), Value::from("beta"), Value::from("gamma")])),
        KeyValue::new(
            "scores",
            Value::array(vec![Value::from(98.5), Value::from(87.3), Value::from(92.1), Value::from(88.8)]),
        ),
        KeyValue::new(
            "metadata",
            Value::object(vec![
                KeyValue::new("source", "api"),
                KeyValue::new("version", "v2"),
                KeyValue::new("region", "us-west"),
            ]),
        ),
        KeyValue::new("active", true),
    ])
}

fn tabular_users(count: usize) -> Value {
    Value::array((0..count).map(|i| {
        Value::object(vec![
            KeyValue::new("id", i as i64),
            KeyValue::new("username", format!("user_{i}")),
            KeyValue::new("created_at", 1_700_000_000i64 + i as i64 * 1000),
            KeyValue::new("is_admin", i % 20 == 0),
        ])
    }))
}

fn main() {
    println!("\n{:=<80}", "");
    println!("TEXT vs. BINARY SIZE COMPARISON REPORT");
    println!("{:=<80}", "");

    report("Small Object (Config)", &small_object());
    report("Large Array (100 points)", &large_array(100));
    report("Large Array (1000 points)", &large_array(1000));
    report("Large Array (10000 points)", &large_array(10_000));
    report("Nested Structs (2 people)", &nested_people());
    report("Mixed Types", &mixed_types());
    report("Tabular Users (100)", &tabular_users(100));
    report("Tabular Users (1000)", &tabular_users(1000));
    report("Tabular Users (5000)", &tabular_users(5000));
}
