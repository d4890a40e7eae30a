use sumi_sieve::config::Config;

pub const TECH_ARTICLE: &str = r#"<html>
<head>
  <title>New Software Release Improves Programming Workflows</title>
  <meta name="description" content="Release notes for developers">
</head>
<body>
  <header><a href="/">Home</a> | <a href="/about">About</a></header>
  <article>
    <h1>New Software Release Improves Programming Workflows</h1>
    <p>The latest software release brings major improvements to programming workflows.
    Developers can now use advanced algorithms and cloud computing features. The technology
    stack includes artificial intelligence components and machine learning models.</p>
    <p>This software update also improves data security, network performance and developer
    tooling across the whole platform. Programming teams report that the new computer
    architecture makes their applications faster and their database queries cheaper.</p>
    <p>The technology industry continues to evolve rapidly with innovations in software
    development, digital infrastructure and automation. Engineers are excited about the new
    internet protocols, the open source libraries that ship with the release, and the code
    review tooling that comes bundled with every developer account.</p>
  </article>
  <footer>All rights reserved</footer>
</body>
</html>"#;

/// A 186-word article: "software" three times, "machine learning" only in the title
pub const ML_ARTICLE: &str = r#"<html>
<head><title>How Machine Learning Is Changing Everyday Work</title></head>
<body>
  <nav><a href="/">Home</a></nav>
  <article>
    <p>
    Across many offices, people now rely on tools that quietly sort email, suggest replies
    and summarize long documents before a morning meeting. The software behind these helpers
    watches patterns in everyday work and adapts to the habits of each person who uses it.
    A planner might see meeting notes drafted within seconds, while an editor receives gentle
    suggestions about tone and clarity. None of this requires special skills from the people
    involved, because the software hides the complicated parts behind simple buttons and short
    menus. Critics worry that automatic suggestions can flatten personal style or repeat old
    mistakes found in earlier examples, so careful review still matters. Designers answer that
    people remain in charge of every final decision and can switch features off at any time.
    Over the coming years, more of this software will run directly on laptops and phones rather
    than on distant servers, which should make responses faster and keep private notes closer
    to their owners. For most readers, the change will feel less like a revolution and more like
    a steady stream of small conveniences that slowly reshape how ordinary days unfold.
    </p>
  </article>
</body>
</html>"#;

/// Defaults tuned for a local mock server: loopback allowed, tiny delays
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.validator.block_loopback = false;
    config.validator.blocked_hosts.clear();
    config.rate_limit.base_delay_ms = 1;
    config.rate_limit.min_delay_ms = 1;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config.scraper.timeout_secs = 5;
    config
}
