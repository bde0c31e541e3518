fn main() {
    if let Err(e) = planwise_lib::run() {
        eprintln!("エラー: {}", e.user_message());
        eprintln!("詳細: {e}");
        std::process::exit(1);
    }
}
