//! Randomized browser User-Agent strings, one per faucet attempt.

use rand::seq::SliceRandom;
use rand::Rng;

const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Windows NT 6.1; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

#[derive(Clone, Copy)]
enum Engine {
    Chrome,
    Firefox,
    Safari,
}

const ENGINES: &[Engine] = &[Engine::Chrome, Engine::Firefox, Engine::Safari];

/// Generate a plausible desktop browser User-Agent.
pub fn random_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);
    let engine = ENGINES.choose(&mut rng).copied().unwrap_or(Engine::Chrome);

    match engine {
        Engine::Chrome => {
            let major = rng.gen_range(110..=131);
            let build = rng.gen_range(4000..=6800);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.{build}.{} Safari/537.36",
                rng.gen_range(0..200)
            )
        }
        Engine::Firefox => {
            let major = rng.gen_range(100..=132);
            format!("Mozilla/5.0 ({platform}; rv:{major}.0) Gecko/20100101 Firefox/{major}.0")
        }
        Engine::Safari => {
            let major = rng.gen_range(15..=18);
            let minor = rng.gen_range(0..=6);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{major}.{minor} Safari/605.1.15"
            )
        }
    }
}
