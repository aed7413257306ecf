pub mod policy_locality;
