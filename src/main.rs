use zombie::error::AppResult;

fn main() -> AppResult<()> {
    zombie::entry::run()
}
