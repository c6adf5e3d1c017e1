mod mailbox_tests;
mod runner_tests;
