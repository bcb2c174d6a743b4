pub mod aws;
pub mod fixture;

pub use aws::AwsProvider;
pub use fixture::FixtureProvider;
