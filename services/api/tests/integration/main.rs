mod helpers;
mod lifecycle_test;
mod reservation_test;
