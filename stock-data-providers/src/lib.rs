pub mod market_watch;
