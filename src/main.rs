fn main() {
    if let Err(error) = syncinsight_lib::run() {
        eprintln!("syncinsight: {error}");
        std::process::exit(1);
    }
}
