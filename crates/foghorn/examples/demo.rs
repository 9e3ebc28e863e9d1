use foghorn::*;

fn main() {
  println!("Foghorn demo\n");

  // Standard logging functions
  verbose("This is a verbose message");
  debug("This is a debug message");
  info("This is an info message");
  warn("This is a warning message");
  error("This is an error message");
  success("This is a success message");

  println!(); // spacing

  // Banners
  blast("Sounding off: the daemon is coming up");
  all_clear("Everything ran to completion");

  println!(); // spacing

  // Multi-line message test
  let multiline = "This is a multiline message\nwith several lines\nto demonstrate formatting";
  info(multiline);
}
