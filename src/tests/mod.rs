mod login;
mod views;
