mod gift_scanner;

pub use gift_scanner::GiftCodeScanner;
