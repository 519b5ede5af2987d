use servertime::{
    format_datetime, humanize, next_sharp_hour, next_week_boundary, time_since_sharp_hour,
    ClockConfig, ResetPeriod,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let clock = ClockConfig::from_env().build();
    // Pretend the master server is ten minutes ahead of us.
    clock.reset_time(clock.now_nanos() + 10 * 60 * 1_000_000_000);

    let now = clock.now();
    println!("server now:      {}", format_datetime(&now));
    println!("in this hour:    {}", humanize::short_duration(time_since_sharp_hour(&now)));
    println!("next hour:       {}", format_datetime(&next_sharp_hour(&now)));
    println!("next daily:      {}", format_datetime(&ResetPeriod::Daily.next_boundary(&now)));
    println!("next weekly:     {}", format_datetime(&next_week_boundary(&now)));
    println!("next monthly:    {}", format_datetime(&ResetPeriod::Monthly.next_boundary(&now)));
}
